pub mod bam;
pub mod compression;
pub mod features;
