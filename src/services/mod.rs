pub mod cart;
pub mod cloudinary;
pub mod razorpay;
pub mod session;
