use crate::memory::Word;
use num_enum::TryFromPrimitive;

/// Negates `value` (two's complement) unless one of the result flags of the
/// previous latch is raised.
pub fn sign_adjust(value: Word, positive: bool, zero: bool) -> Word {
    if positive || zero {
        value
    } else {
        value.wrapping_neg()
    }
}

macro_rules! operations {
    ( $( $( #[doc = $doc:expr] )+ $name:ident = $repr:literal , )+ ) => {
        /// Functions of the ALU, indexed by the selector nibble
        #[repr(u8)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[derive(TryFromPrimitive)]
        pub enum AluOp {
            $(
                $( #[doc = $doc] )+
                $name = $repr,
            )+
        }

        impl AluOp {
            pub const ALL: &'static [Self] = &[
                $( Self::$name , )+
            ];

            pub fn name(&self) -> &'static str {
                match self {
                    $( Self::$name => stringify!($name) , )+
                }
            }
        }

        impl ::std::fmt::Display for AluOp {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                f.write_str(self.name())
            }
        }
    }
}

operations! {
    /// Sign adjusted accumulator
    SignAdjust = 0x0,
    /// Passes the second operand through
    Move = 0x1,
    /// Sign adjusted accumulator plus the second operand
    Add = 0x2,
    /// Sign adjusted accumulator minus the second operand
    Subtract = 0x3,
    /// Constant zero
    Zero = 0xF,
}

impl AluOp {
    /// Computes the ALU output. `positive` and `zero` are the effective
    /// result flags of the previous latch.
    pub fn apply(self, first: Word, second: Word, positive: bool, zero: bool) -> Word {
        match self {
            AluOp::SignAdjust => sign_adjust(first, positive, zero),
            AluOp::Move => second,
            AluOp::Add => sign_adjust(first, positive, zero).wrapping_add(second),
            AluOp::Subtract => sign_adjust(first, positive, zero).wrapping_sub(second),
            AluOp::Zero => 0,
        }
    }
}
