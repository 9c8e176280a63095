mod helpers;
mod lifecycle;
mod location_lookup;
mod settings_flow;
