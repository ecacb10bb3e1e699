//! Command descriptors: the handler plus its declared parameter list.

use std::sync::Arc;

use super::RegistryError;
use super::context::RunContext;
use super::params::{Bindings, ParamSpec, Value};
use super::schema::Schema;

/// Handler closure invoked with the dispatch context and the values bound at
/// its node. `Send + Sync` so a built tree can serve concurrent dispatches.
pub type HandlerFn =
    Box<dyn Fn(&mut RunContext, &Bindings) -> crate::error::Result<Value> + Send + Sync>;

enum HandlerKind {
    Func(HandlerFn),
    Schema(Arc<Schema>),
    Nop,
}

/// A command descriptor: display name, documentation, ordered parameters, and
/// the underlying handler. Parameters are declared explicitly at registration
/// time; for schema-backed methods they are derived once from the schema's
/// fields.
pub struct Method {
    name: String,
    doc: String,
    params: Vec<ParamSpec>,
    kind: HandlerKind,
}

impl std::fmt::Debug for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.kind {
            HandlerKind::Func(_) => "Func",
            HandlerKind::Schema(_) => "Schema",
            HandlerKind::Nop => "Nop",
        };
        f.debug_struct("Method")
            .field("name", &self.name)
            .field("doc", &self.doc)
            .field("params", &self.params)
            .field("kind", &kind)
            .finish()
    }
}

impl Method {
    /// Wrap a plain handler with an explicit parameter list.
    ///
    /// # Errors
    /// Returns [`RegistryError::DuplicateParameter`] when two parameters share
    /// a name.
    pub fn from_fn<F>(
        name: impl Into<String>,
        doc: impl Into<String>,
        params: Vec<ParamSpec>,
        handler: F,
    ) -> Result<Self, RegistryError>
    where
        F: Fn(&mut RunContext, &Bindings) -> crate::error::Result<Value> + Send + Sync + 'static,
    {
        let name = name.into();
        ensure_unique_params(&name, &params)?;
        Ok(Self {
            name,
            doc: doc.into(),
            params,
            kind: HandlerKind::Func(Box::new(handler)),
        })
    }

    /// Wrap a structured-config type: invoking the method constructs a
    /// validated instance from the bound values. The display name,
    /// documentation, and parameters all derive from the schema.
    ///
    /// # Errors
    /// Returns [`RegistryError::DuplicateParameter`] when two fields share a
    /// name.
    pub fn from_schema(schema: Schema) -> Result<Self, RegistryError> {
        ensure_unique_params(schema.name(), schema.fields())?;
        Ok(Self {
            name: schema.name().to_string(),
            doc: schema.doc().to_string(),
            params: schema.fields().to_vec(),
            kind: HandlerKind::Schema(Arc::new(schema)),
        })
    }

    /// A parameterless no-op handler, useful as a bare intermediate node.
    #[must_use]
    pub fn nop() -> Self {
        Self {
            name: "nop".to_string(),
            doc: String::new(),
            params: Vec::new(),
            kind: HandlerKind::Nop,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    pub fn params(&self) -> &[ParamSpec] {
        &self.params
    }

    /// By-name lookup over the same ordered parameter sequence.
    pub fn param(&self, name: &str) -> Option<&ParamSpec> {
        self.params.iter().find(|param| param.name() == name)
    }

    /// Partition the parameters into required positionals and options,
    /// preserving declaration order within each group.
    pub(crate) fn split_args_opts(&self) -> (Vec<&ParamSpec>, Vec<&ParamSpec>) {
        self.params.iter().partition(|param| param.is_required())
    }

    /// Invoke the handler with the bound values, or construct the schema
    /// instance for config-type nodes.
    pub(crate) fn invoke(
        &self,
        ctx: &mut RunContext,
        bindings: &Bindings,
    ) -> crate::error::Result<Value> {
        match &self.kind {
            HandlerKind::Func(handler) => handler(ctx, bindings),
            HandlerKind::Schema(schema) => Ok(schema.build(bindings)?),
            HandlerKind::Nop => Ok(Value::Unit),
        }
    }
}

fn ensure_unique_params(method: &str, params: &[ParamSpec]) -> Result<(), RegistryError> {
    for (index, param) in params.iter().enumerate() {
        if params[..index].iter().any(|other| other.name() == param.name()) {
            return Err(RegistryError::DuplicateParameter {
                method: method.to_string(),
                parameter: param.name().to_string(),
            });
        }
    }
    Ok(())
}
