mod common;
mod review;
