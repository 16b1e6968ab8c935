/// Declares a fieldless `#[repr(u32)]` enum that is stored as a single word in recorded payloads.
///
/// Generates `ALL`, `to_word()` and `from_word()`; decoding an unknown word yields `None` so the
/// replayer can treat it as stream corruption instead of transmuting garbage.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $value:expr ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[repr(u32)]
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
        $vis enum $name {
            $( $(#[$vmeta])* $variant = $value ),+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            #[inline]
            pub const fn to_word(self) -> u32 {
                self as u32
            }

            pub fn from_word(word: u32) -> Option<Self> {
                match word {
                    $( x if x == $name::$variant as u32 => Some($name::$variant), )+
                    _ => None,
                }
            }
        }
    };
}
