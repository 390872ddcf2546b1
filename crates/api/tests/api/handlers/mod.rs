mod middleware_test;
mod panel_test;
mod public_test;
