//! The mnemonic table.
//!
//! Every operation the executor understands is declared exactly once, in
//! [`for_each_mnemonic!`]. The enum, the name lookup, and the arity checks
//! are all generated from that single list, so adding an operation is a
//! one-line change.

/// Invokes a callback macro with the complete mnemonic definition list.
///
/// Entry format: `Variant = "source name" => arity(count)` where arity is
/// `exact` or `at_least`.
#[macro_export]
macro_rules! for_each_mnemonic {
    ($callback:ident) => {
        $callback! {
            // ==================== Data movement ====================
            /// `mov dst, src`: store the value of `src` into `dst`.
            Mov = "mov" => exact(2),
            /// `str dst, part, ...`: write the concatenated parts as a
            /// NUL-terminated string at the address given by `dst`'s value.
            /// String parts paste verbatim; every other part contributes
            /// the character its value encodes.
            Str = "str" => at_least(2),
            // ==================== Arithmetic ====================
            /// `add dst, src`: `dst`'s cell plus the value of `src`, in place.
            Add = "add" => exact(2),
            /// `sub dst, src`: subtraction, in place.
            Sub = "sub" => exact(2),
            /// `mul dst, src`: multiplication, in place.
            Mul = "mul" => exact(2),
            /// `div dst, src`: floored division, in place. Faults on zero.
            Div = "div" => exact(2),
            /// `mod dst, src`: floored remainder, in place. Faults on zero.
            Mod = "mod" => exact(2),
            /// `or dst, src`: bitwise or, in place.
            Or = "or" => exact(2),
            /// `and dst, src`: bitwise and, in place.
            And = "and" => exact(2),
            /// `xor dst, src`: bitwise xor, in place.
            Xor = "xor" => exact(2),
            /// `not dst`: bitwise complement, in place.
            Not = "not" => exact(1),
            /// `inc dst`: add one, in place.
            Inc = "inc" => exact(1),
            /// `dec dst`: subtract one, in place.
            Dec = "dec" => exact(1),
            // ==================== Control flow ====================
            /// `jmp label`: enter `label`, never returning here.
            Jmp = "jmp" => exact(1),
            /// `call label`: run `label` to completion, then resume here.
            Call = "call" => exact(1),
            /// `je a, b, label`: enter `label` when `a` equals `b`.
            Je = "je" => exact(3),
            /// `jg a, b, label`: enter `label` when `a` is greater than `b`.
            Jg = "jg" => exact(3),
            /// `jl a, b, label`: enter `label` when `a` is less than `b`.
            Jl = "jl" => exact(3),
            // ==================== Host interface ====================
            /// `syscall n`: request host service `n`; `eax`, `ebx` and `ecx`
            /// carry the arguments.
            Syscall = "syscall" => exact(1),
        }
    };
}

/// Generates [`Mnemonic`] and its lookup and arity tables from the
/// definition list.
#[macro_export]
macro_rules! define_mnemonics {
    (
        $(
            $(#[$doc:meta])*
            $name:ident = $text:literal => $kind:ident($count:literal)
        ),* $(,)?
    ) => {
        /// An operation name recognized by the executor.
        #[derive(Copy, Clone, Debug, Eq, PartialEq)]
        pub enum Mnemonic {
            $(
                $(#[$doc])*
                $name,
            )*
        }

        impl Mnemonic {
            /// Resolves a lowercased word to its mnemonic, if any.
            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($text => Some(Mnemonic::$name),)*
                    _ => None,
                }
            }

            /// The source text of this mnemonic.
            pub const fn name(self) -> &'static str {
                match self {
                    $(Mnemonic::$name => $text,)*
                }
            }

            /// Whether `count` operands satisfy this mnemonic's arity.
            pub const fn accepts_arity(self, count: usize) -> bool {
                match self {
                    $(Mnemonic::$name => $crate::define_mnemonics!(@check $kind, $count, count),)*
                }
            }

            /// Human-readable operand count, for arity fault messages.
            pub const fn arity_text(self) -> &'static str {
                match self {
                    $(Mnemonic::$name => $crate::define_mnemonics!(@text $kind, $count),)*
                }
            }
        }
    };

    // ==================== Arity helpers ====================
    (@check exact, $expected:literal, $count:ident) => { $count == $expected };
    (@check at_least, $expected:literal, $count:ident) => { $count >= $expected };
    (@text exact, $expected:literal) => { stringify!($expected) };
    (@text at_least, $expected:literal) => { concat!("at least ", stringify!($expected)) };
}

for_each_mnemonic!(define_mnemonics);
