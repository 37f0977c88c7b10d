/// A number between 1 and 40 (inclusive).
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Version(u8);

impl Version {
    /// The minimum version number supported in the QR Code Model 2 standard.
    pub const MIN: Version = Version(1);

    /// The maximum version number supported in the QR Code Model 2 standard.
    pub const MAX: Version = Version(40);

    /// Creates a version object from the given number.
    ///
    /// Panics if the number is outside the range [1, 40].
    pub fn new(ver: u8) -> Self {
        assert!(
            (Version::MIN.value()..=Version::MAX.value()).contains(&ver),
            "Version number out of range"
        );
        Self(ver)
    }

    /// Returns the value, which is in the range [1, 40].
    pub fn value(self) -> u8 {
        self.0
    }

    /// Returns the side length of the symbol in modules: `17 + 4*version`.
    pub fn size(self) -> i32 {
        i32::from(self.0) * 4 + 17
    }

    /// Returns the version whose `size()` matches a symbol of the given side
    /// length, or `None` if the length is not `17 + 4*v` for some `v` in `1..=40`.
    pub fn from_size(size: i32) -> Option<Self> {
        if size < 21 || size > 177 || (size - 17) % 4 != 0 {
            return None;
        }
        let ver = ((size - 17) / 4) as u8;
        (Self::MIN.value()..=Self::MAX.value())
            .contains(&ver)
            .then(|| Self(ver))
    }
}
