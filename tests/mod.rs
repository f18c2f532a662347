mod shift_engine_tests;

// This file organizes the integration tests into a cohesive test suite.
// Each module tests a specific aspect of the application:
// - smoke_tests: Basic functionality tests to ensure nothing is broken
// - calendar_feed_mock: Mocking the calendar feed for testing without network access
// - shift_engine_tests: End-to-end extraction over realistic ICS feeds
// - routes_tests: Driving the HTTP router without binding a socket
