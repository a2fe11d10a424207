mod session;
mod startup;
mod state;
mod stub_native;
