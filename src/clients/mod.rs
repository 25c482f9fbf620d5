//! 外部服务客户端

pub mod backend;
pub mod completion;

pub use backend::BackendClient;
pub use completion::{CompletionBackend, OpenAiCompletionClient};
