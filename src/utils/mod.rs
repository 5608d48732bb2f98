pub mod seed_file;
