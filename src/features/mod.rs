pub mod hashing;
pub mod stopwords;
pub mod vector;

pub use hashing::HashingVectorizer;
pub use vector::SparseVector;
