use ratatui::style::Color;

/// All themeable colors in the application
#[derive(Clone, Debug)]
pub struct Theme {
    // Severity tiers
    pub severity_high: Color,
    pub severity_medium: Color,
    pub severity_low: Color,

    // Panel borders
    pub border_focused: Color,
    pub border_unfocused: Color,
    pub border_paused: Color,

    // Status line
    pub status_mode_bg: Color,
    pub status_mode_fg: Color,
    pub status_help: Color,
    pub status_bg: Color,

    // Bookmarks
    pub bookmark: Color,

    // Overlays
    pub overlay_selected: Color,
    pub prompt_prefix: Color,

    // Empty states / messages
    pub empty_state: Color,
    pub warning_message: Color,
    pub error_message: Color,

    // Help overlay
    pub help_border: Color,
    pub help_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_theme()
    }
}

impl Theme {
    pub fn default_theme() -> Self {
        Self {
            severity_high: Color::Red,
            severity_medium: Color::Yellow,
            severity_low: Color::LightBlue,

            border_focused: Color::Cyan,
            border_unfocused: Color::DarkGray,
            border_paused: Color::Yellow,

            status_mode_bg: Color::Blue,
            status_mode_fg: Color::White,
            status_help: Color::DarkGray,
            status_bg: Color::Black,

            bookmark: Color::Green,

            overlay_selected: Color::Yellow,
            prompt_prefix: Color::Yellow,

            empty_state: Color::DarkGray,
            warning_message: Color::Yellow,
            error_message: Color::Red,

            help_border: Color::Cyan,
            help_bg: Color::Black,
        }
    }

    /// Kawaii theme - cute pastel colors
    pub fn kawaii() -> Self {
        Self {
            severity_high: Color::Rgb(255, 121, 162),  // Pink-red
            severity_medium: Color::Rgb(255, 198, 124), // Peach
            severity_low: Color::Rgb(152, 225, 190),    // Mint

            border_focused: Color::Rgb(255, 174, 213), // Light pink
            border_unfocused: Color::Rgb(120, 110, 140),
            border_paused: Color::Rgb(255, 214, 182),

            status_mode_bg: Color::Rgb(203, 166, 247), // Lavender
            status_mode_fg: Color::Rgb(40, 30, 50),
            status_help: Color::Rgb(150, 140, 170),
            status_bg: Color::Rgb(40, 30, 50),

            bookmark: Color::Rgb(255, 174, 213),

            overlay_selected: Color::Rgb(255, 214, 182),
            prompt_prefix: Color::Rgb(203, 166, 247),

            empty_state: Color::Rgb(150, 140, 170),
            warning_message: Color::Rgb(255, 198, 124),
            error_message: Color::Rgb(255, 121, 162),

            help_border: Color::Rgb(255, 174, 213),
            help_bg: Color::Rgb(40, 30, 50),
        }
    }

    /// Cyber theme - neon on black
    pub fn cyber() -> Self {
        Self {
            severity_high: Color::Rgb(255, 0, 85),
            severity_medium: Color::Rgb(255, 230, 0),
            severity_low: Color::Rgb(0, 255, 159),

            border_focused: Color::Rgb(0, 255, 255),
            border_unfocused: Color::Rgb(60, 60, 90),
            border_paused: Color::Rgb(255, 230, 0),

            status_mode_bg: Color::Rgb(255, 0, 255),
            status_mode_fg: Color::Rgb(0, 0, 0),
            status_help: Color::Rgb(100, 100, 140),
            status_bg: Color::Rgb(10, 10, 20),

            bookmark: Color::Rgb(255, 0, 255),

            overlay_selected: Color::Rgb(0, 255, 255),
            prompt_prefix: Color::Rgb(255, 0, 255),

            empty_state: Color::Rgb(100, 100, 140),
            warning_message: Color::Rgb(255, 230, 0),
            error_message: Color::Rgb(255, 0, 85),

            help_border: Color::Rgb(0, 255, 255),
            help_bg: Color::Rgb(10, 10, 20),
        }
    }

    /// Dracula theme
    pub fn dracula() -> Self {
        Self {
            severity_high: Color::Rgb(255, 85, 85),
            severity_medium: Color::Rgb(241, 250, 140),
            severity_low: Color::Rgb(139, 233, 253),

            border_focused: Color::Rgb(189, 147, 249),
            border_unfocused: Color::Rgb(98, 114, 164),
            border_paused: Color::Rgb(255, 184, 108),

            status_mode_bg: Color::Rgb(189, 147, 249),
            status_mode_fg: Color::Rgb(40, 42, 54),
            status_help: Color::Rgb(98, 114, 164),
            status_bg: Color::Rgb(40, 42, 54),

            bookmark: Color::Rgb(80, 250, 123),

            overlay_selected: Color::Rgb(241, 250, 140),
            prompt_prefix: Color::Rgb(255, 121, 198),

            empty_state: Color::Rgb(98, 114, 164),
            warning_message: Color::Rgb(255, 184, 108),
            error_message: Color::Rgb(255, 85, 85),

            help_border: Color::Rgb(189, 147, 249),
            help_bg: Color::Rgb(40, 42, 54),
        }
    }

    /// Monochrome theme - grayscale only
    pub fn monochrome() -> Self {
        Self {
            severity_high: Color::Rgb(255, 255, 255),
            severity_medium: Color::Rgb(200, 200, 200),
            severity_low: Color::Rgb(170, 170, 170),

            border_focused: Color::Rgb(200, 200, 200),
            border_unfocused: Color::Rgb(80, 80, 80),
            border_paused: Color::Rgb(140, 140, 140),

            status_mode_bg: Color::Rgb(200, 200, 200),
            status_mode_fg: Color::Rgb(0, 0, 0),
            status_help: Color::Rgb(120, 120, 120),
            status_bg: Color::Rgb(30, 30, 30),

            bookmark: Color::Rgb(255, 255, 255),

            overlay_selected: Color::Rgb(255, 255, 255),
            prompt_prefix: Color::Rgb(180, 180, 180),

            empty_state: Color::Rgb(120, 120, 120),
            warning_message: Color::Rgb(200, 200, 200),
            error_message: Color::Rgb(255, 255, 255),

            help_border: Color::Rgb(180, 180, 180),
            help_bg: Color::Rgb(20, 20, 20),
        }
    }

    /// Get a theme by name
    pub fn by_name(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "kawaii" => Self::kawaii(),
            "cyber" | "futuristic" => Self::cyber(),
            "monochrome" | "mono" => Self::monochrome(),
            "dracula" => Self::dracula(),
            _ => Self::default_theme(),
        }
    }
}
