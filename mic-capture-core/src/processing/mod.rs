pub mod pcm;
pub mod volume;
