pub mod impersonation;
pub mod sts;
