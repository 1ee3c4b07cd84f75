pub mod clock;
pub mod credential;
pub mod drop;
pub mod request;
pub mod token;

pub use clock::{Clock, ManualClock, SystemClock};
pub use credential::{Argon2Hasher, CredentialError, CredentialHasher};
pub use drop::{Drop, DropContent, DropKind, DropSnapshot, FileRef};
pub use request::{CreateDrop, CreatedDrop, NewContent};
pub use token::{RandomTokenGenerator, TokenGenerator};
