use core::fmt::Display;

/// Holds the context for the current run. Used for prefixing logs.
#[derive(Default, Debug, Clone)]
pub struct Context {
    /// The destination being backed up to.
    pub destination: Option<String>,
    /// The current context
    pub current_context: &'static str,
}

impl Context {
    /// Creates a context for a destination.
    pub fn for_destination(destination: impl Into<String>) -> Self {
        Self {
            destination: Some(destination.into()),
            current_context: "",
        }
    }
}

impl Display for Context {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        if let Some(destination) = &self.destination {
            write!(f, "[{destination}] ")?;
        }

        if !self.current_context.is_empty() {
            write!(f, "[{}] ", self.current_context)?;
        }

        Ok(())
    }
}
