pub mod server;

pub use server::SummationServiceImpl;
