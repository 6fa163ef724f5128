pub mod caption;
pub mod client;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use caption::GeminiCaptionClient;
pub use client::GeminiHttpClient;
