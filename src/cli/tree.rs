//! Command-tree registration. The tree is built once, before any dispatch,
//! and is read-only thereafter.

use super::RegistryError;
use super::method::Method;

/// One point in the command tree: a [`Method`] plus an ordered mapping of
/// child name to child node. A node exclusively owns its children.
///
/// Children are keyed by the lowercased registered name but matched
/// case-sensitively against the raw token, so dispatch requires the stored
/// spelling at the call site.
#[derive(Debug)]
pub struct ActionTree {
    method: Method,
    children: Vec<(String, ActionTree)>,
    help_option: Option<String>,
}

impl ActionTree {
    #[must_use]
    pub fn new(method: Method) -> Self {
        Self {
            method,
            children: Vec::new(),
            help_option: None,
        }
    }

    /// A tree rooted at a no-op handler.
    #[must_use]
    pub fn nop() -> Self {
        Self::new(Method::nop())
    }

    /// Register a child node for the method, keyed by its lowercased display
    /// name, and return it for further registration.
    ///
    /// # Errors
    /// Returns [`RegistryError::DuplicateAction`] when the name is taken.
    pub fn add(&mut self, method: Method) -> Result<&mut ActionTree, RegistryError> {
        let key = method.name().to_lowercase();
        if self.children.iter().any(|(existing, _)| *existing == key) {
            return Err(RegistryError::DuplicateAction { name: key });
        }
        self.children.push((key, ActionTree::new(method)));
        let Some((_, child)) = self.children.last_mut() else {
            unreachable!("child was just pushed");
        };
        Ok(child)
    }

    /// Designate, by name, which of this node's options is the conventional
    /// help flag. Consulted against the root node only, after the whole token
    /// stream is parsed.
    ///
    /// # Errors
    /// The named option must exist and be a toggle.
    pub fn designate_help(&mut self, name: &str) -> Result<(), RegistryError> {
        let Some(param) = self.method.param(name) else {
            return Err(RegistryError::UnknownHelpOption {
                name: name.to_string(),
            });
        };
        if !param.is_toggle() {
            return Err(RegistryError::NonToggleHelpOption {
                name: name.to_string(),
            });
        }
        self.help_option = Some(name.to_string());
        Ok(())
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Exact match of a token against the stored child names.
    pub fn child(&self, token: &str) -> Option<&ActionTree> {
        self.children
            .iter()
            .find(|(name, _)| name.as_str() == token)
            .map(|(_, child)| child)
    }

    /// Children in declaration order.
    pub fn children(&self) -> impl Iterator<Item = (&str, &ActionTree)> + '_ {
        self.children
            .iter()
            .map(|(name, child)| (name.as_str(), child))
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub(crate) fn child_names(&self) -> Vec<String> {
        self.children.iter().map(|(name, _)| name.clone()).collect()
    }

    pub(crate) fn help_option(&self) -> Option<&str> {
        self.help_option.as_deref()
    }
}
