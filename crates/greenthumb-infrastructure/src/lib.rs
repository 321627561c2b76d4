pub mod config_service;
pub mod conversation_repository;
pub mod dto;
pub mod image_normalizer;
pub mod paths;
pub mod secret_service;
pub mod storage;

pub use crate::config_service::ConfigService;
pub use crate::conversation_repository::{CHAT_HISTORY_KEY, FileConversationRepository};
pub use crate::image_normalizer::ImageNormalizer;
pub use crate::paths::GreenThumbPaths;
pub use crate::secret_service::EnvSecretService;
pub use crate::storage::JsonKeyValueStore;
