//! Repository layer.
//!
//! Each entity has one `async_trait` repository trait with two backends:
//! `Mem*Repo` (process-local, `tokio::sync::RwLock`) and `Pg*Repo`
//! (PostgreSQL through a shared `PgPool`). Handlers only ever see the trait
//! objects bundled in [`crate::Store`].

pub mod competition_repo;
pub mod notification_repo;
pub mod prize_repo;
pub mod registration_repo;
pub mod user_repo;
pub mod vote_repo;

pub use competition_repo::{CompetitionRepository, MemCompetitionRepo, PgCompetitionRepo};
pub use notification_repo::{MemNotificationRepo, NotificationRepository, PgNotificationRepo};
pub use prize_repo::{MemPrizeRepo, PgPrizeRepo, PrizeRepository};
pub use registration_repo::{MemRegistrationRepo, PgRegistrationRepo, RegistrationRepository};
pub use user_repo::{MemUserRepo, PgUserRepo, UserRepository};
pub use vote_repo::{MemVoteRepo, PgVoteRepo, VoteRepository};
