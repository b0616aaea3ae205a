pub mod protected; // JWT authentication required
pub mod public; // No authentication required
