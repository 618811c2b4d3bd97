//! Test doubles for the model capability.

pub mod mock_llm;
pub mod mock_llm_server;

pub use mock_llm::MockLLM;
pub use mock_llm_server::MockLLMServer;
