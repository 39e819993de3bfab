//! Digiclaw Common - wire types shared by the status daemon and its clients.
//!
//! The snapshot schema served on `/api/status` and the narrower legacy view
//! served on `/api/system` both live here, together with the adapter that
//! derives one from the other.

pub mod legacy;
pub mod snapshot;

pub use legacy::{project, LegacyActivity, LegacyProject, LegacyView, FALLBACKS};
pub use snapshot::{SectionResult, StatusSnapshot};
