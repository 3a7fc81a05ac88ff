//! Integration tests driving the js-rail binary against temporary repositories

#![cfg(unix)]

mod helpers;
mod test_preflight;
mod test_release;
