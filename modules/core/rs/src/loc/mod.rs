pub use strand::{InvalidStrand, Strand};

mod strand;
