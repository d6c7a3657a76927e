/// Financial Information eXchange (FIX) 4.4 tag=value protocol.
pub mod fix;
