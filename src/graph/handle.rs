//! Edge endpoint handles.
//!
//! Struct nodes expose one port per field: `field-<Name>-out` on the source
//! side and `field-<Name>-in` on the target side. Transformer nodes expose
//! `transformer-in` and `transformer-out`.

/// Field key used when an edge endpoint does not name a field
pub const UNKNOWN_FIELD: &str = "unknown";

pub const TRANSFORMER_IN: &str = "transformer-in";
pub const TRANSFORMER_OUT: &str = "transformer-out";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle<'a> {
    Field(&'a str),
    TransformerIn,
    TransformerOut,
    Other(&'a str),
}

impl<'a> Handle<'a> {
    pub fn parse(handle: &'a str) -> Self {
        match handle {
            TRANSFORMER_IN => Handle::TransformerIn,
            TRANSFORMER_OUT => Handle::TransformerOut,
            _ => match handle
                .strip_prefix("field-")
                .and_then(|rest| rest.strip_suffix("-out").or_else(|| rest.strip_suffix("-in")))
            {
                Some(name) if !name.is_empty() => Handle::Field(name),
                _ => Handle::Other(handle),
            },
        }
    }

    pub fn field(self) -> Option<&'a str> {
        match self {
            Handle::Field(name) => Some(name),
            _ => None,
        }
    }
}

/// Field name behind an optional handle, or `unknown`
pub fn field_key(handle: Option<&str>) -> String {
    handle
        .map(Handle::parse)
        .and_then(Handle::field)
        .unwrap_or(UNKNOWN_FIELD)
        .to_string()
}

pub fn source_handle(field: &str) -> String {
    format!("field-{}-out", field)
}

pub fn target_handle(field: &str) -> String {
    format!("field-{}-in", field)
}
