use tracing::trace;

pub const DEFAULT_SLIDES: [&str; 4] = ["/sample.jpg", "/sample.jpg", "/sample.jpg", "/sample.jpg"];

/// Ordered slide references with a cursor that never leaves `[0, len-1]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slideshow {
    slides: Vec<String>,
    current: usize,
    fullscreen: bool,
}

impl Default for Slideshow {
    fn default() -> Self {
        Slideshow::new(DEFAULT_SLIDES.iter().map(|s| s.to_string()).collect())
    }
}

impl Slideshow {
    pub fn new(slides: Vec<String>) -> Self {
        Self {
            slides,
            current: 0,
            fullscreen: false,
        }
    }

    pub fn slides(&self) -> &[String] {
        &self.slides
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_slide(&self) -> Option<&str> {
        self.slides.get(self.current).map(String::as_str)
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    pub fn has_next(&self) -> bool {
        self.current + 1 < self.slides.len()
    }

    pub fn has_previous(&self) -> bool {
        self.current > 0
    }

    pub fn next(&mut self) {
        if self.has_next() {
            self.current += 1;
        }
        trace!("Slide {}", self.counter());
    }

    pub fn previous(&mut self) {
        if self.has_previous() {
            self.current -= 1;
        }
        trace!("Slide {}", self.counter());
    }

    /// Out of range indices are ignored.
    pub fn jump(&mut self, index: usize) {
        if index < self.slides.len() {
            self.current = index;
        }
    }

    pub fn toggle_fullscreen(&mut self) {
        self.fullscreen = !self.fullscreen;
    }

    pub fn exit_fullscreen(&mut self) {
        self.fullscreen = false;
    }

    /// `"2 / 4"`, or `"0 / 0"` without slides.
    pub fn counter(&self) -> String {
        if self.slides.is_empty() {
            "0 / 0".to_string()
        } else {
            format!("{} / {}", self.current + 1, self.slides.len())
        }
    }
}
