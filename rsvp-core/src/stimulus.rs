use std::fmt;

/// Interned picture file name. Cloning is a refcount bump.
pub type PictureId = string_cache::DefaultAtom;

/// Placeholder shown in place of real pictures during practice trials.
pub const PRACTICE_OLD: &str = "practice";
pub const PRACTICE_NEW: &str = "practice_new";

/// One of the four fixed picture slots around the screen centre.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Quadrant {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Quadrant {
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopLeft,
        Quadrant::TopRight,
        Quadrant::BottomLeft,
        Quadrant::BottomRight,
    ];

    /// 1-based label used in the data log.
    pub fn number(self) -> u8 {
        match self {
            Quadrant::TopLeft => 1,
            Quadrant::TopRight => 2,
            Quadrant::BottomLeft => 3,
            Quadrant::BottomRight => 4,
        }
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub quadrant: Quadrant,
    pub picture: PictureId,
}

/// Everything the presenter can be asked to put on screen.
#[derive(Debug, Clone, PartialEq)]
pub enum Screen {
    Blank,
    Fixation,
    /// One RSVP frame: a grey mask in every quadrant with `pictures` drawn on top.
    /// Lead and trail frames carry no pictures.
    Rsvp { pictures: Vec<Placement> },
    TestPicture(PictureId),
    Text { title: String, body: String },
}

impl Screen {
    pub fn text(title: impl Into<String>, body: impl Into<String>) -> Self {
        Screen::Text {
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn mask_only() -> Self {
        Screen::Rsvp {
            pictures: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quadrants_are_numbered_in_reading_order() {
        let numbers: Vec<u8> = Quadrant::ALL.iter().map(|q| q.number()).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4]);
        assert_eq!(Quadrant::BottomLeft.to_string(), "3");
    }

    #[test]
    fn picture_ids_compare_by_name() {
        let a = PictureId::from("beach.jpg");
        let b = PictureId::from("beach.jpg");
        assert_eq!(a, b);
        assert_eq!(&*a, "beach.jpg");
    }
}
