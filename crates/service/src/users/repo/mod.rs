pub mod memory;
pub mod seaorm;

pub use memory::MemoryUserRepository;
pub use seaorm::SeaOrmUserRepository;
