//! Module pipeline: query context, module contract, roster and dispatcher.
//!
//! Flow: [`roster`] builds the modules -> [`loader`] configures them ->
//! [`dispatcher`] runs each record through the active pipeline.

pub mod dispatcher;
pub mod loader;
pub mod query;
pub mod roster;
pub mod traits;

pub use dispatcher::{ChainState, Pipeline};
pub use query::{QueryContext, ResponseCode};
pub use roster::{ActivePipeline, Roster};
pub use traits::{Capabilities, Module};
