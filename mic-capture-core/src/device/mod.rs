pub mod microphone;
