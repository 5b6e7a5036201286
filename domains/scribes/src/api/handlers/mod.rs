pub mod scribes;
