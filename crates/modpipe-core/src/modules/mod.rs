//! Standard modules.
//!
//! | Name       | Capabilities                             |
//! |------------|------------------------------------------|
//! | `cache`    | config, cleanup, post (when remembering) |
//! | `toupper`  | config                                   |
//! | `decorate` | config, post                             |
//! | `tolower`  | config                                   |
//! | `magic`    | config, cleanup                          |

pub mod cache;
pub mod case;
pub mod decorate;
pub mod magic;

pub use cache::CacheModule;
pub use case::CaseModule;
pub use decorate::DecorateModule;
pub use magic::MagicModule;
