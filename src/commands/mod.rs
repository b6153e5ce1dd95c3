pub mod unprotect;
