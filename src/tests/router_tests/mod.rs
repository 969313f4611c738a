mod client_tests;
mod nearby_tests;
