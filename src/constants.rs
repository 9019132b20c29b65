pub mod session {

    pub const USER_KEY: &str = "curr_user";
}

pub mod limits {

    pub const MESSAGE_MAX_CHARS: usize = 140;

    pub const HOME_FEED_WINDOW: u64 = 100;

    pub const USERNAME_MAX_CHARS: usize = 30;

    pub const PASSWORD_MIN_CHARS: usize = 6;
}

pub mod defaults {

    pub const PROFILE_IMAGE_URL: &str = "/static/images/default-pic.png";

    pub const HEADER_IMAGE_URL: &str = "/static/images/default-header.jpg";
}
