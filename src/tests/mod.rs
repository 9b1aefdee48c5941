
mod morph;
mod service;
