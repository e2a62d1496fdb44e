pub mod seaorm;

pub use seaorm::SeaOrmDirectoryRepository;
