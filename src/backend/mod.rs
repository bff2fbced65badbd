pub mod headless;
pub use headless::Headless;
