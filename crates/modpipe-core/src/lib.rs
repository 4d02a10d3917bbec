//! # modpipe-core
//!
//! Core engine for modpipe.
//!
//! Contains the query context, the module contract, the module roster and
//! active pipeline, the forward/reverse dispatcher, the config store and
//! loader, the line source, and the standard modules.

pub mod bootstrap;
pub mod config_store;
pub mod line_source;
pub mod modules;
pub mod pipeline;
