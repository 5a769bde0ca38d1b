mod set_url;
mod show;

pub use set_url::run_set_url;
pub use show::run_show;
