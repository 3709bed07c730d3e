pub mod link_signer;
pub mod upload;

pub use link_signer::LinkSigner;
pub use upload::VideoUploadService;
