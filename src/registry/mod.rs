pub mod catalog;
pub mod handlers;

use serde::Serialize;

use crate::access::AccessLevel;
use crate::error::ScriptError;
use crate::session::Session;

use handlers::{access, export, files, fold, stage};

// ── Keyword metadata ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KeywordCategory {
    /// Stages a value for the next structural command.
    Parameter,
    /// Builds or folds the paper.
    Fold,
    /// Reads or writes files other than exports.
    File,
    Export,
    /// Privileges and diagnostics.
    Terminal,
}

impl KeywordCategory {
    pub fn slug(&self) -> &'static str {
        match self {
            Self::Parameter => "parameter",
            Self::Fold => "fold",
            Self::File => "file",
            Self::Export => "export",
            Self::Terminal => "terminal",
        }
    }
}

pub struct KeywordInfo {
    pub name: &'static str,
    pub description: &'static str,
    pub category: KeywordCategory,
    pub access: AccessLevel,
    /// Fails with MissingPrecondition while the session has no paper.
    pub needs_model: bool,
}

/// A recognized script word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Param(ParamKeyword),
    Command(CommandKeyword),
}

// ── define_keywords! macro ──────────────────────────────────────

/// Single source of truth for the script vocabulary. Generates:
/// 1. `ParamKeyword` and `CommandKeyword` closed enums
/// 2. `info()` metadata (name, description, category, minimum access)
/// 3. `dispatch()` to the handler of each keyword
/// 4. `lookup()` from a script word to its keyword
macro_rules! define_keywords {
    (
        params {
            $(
                $pv:ident => $ph:path, $pn:literal : $pd:literal ;
            )*
        }
        commands {
            $(
                [ $cc:expr, $ca:expr $(, $cf:ident)* ]
                $cv:ident => $ch:path, $cn:literal : $cd:literal ;
            )*
        }
    ) => {
        // ── 1. Keyword enums ──
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum ParamKeyword {
            $( $pv, )*
        }

        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum CommandKeyword {
            $( $cv, )*
        }

        // ── 2. info() ──
        impl ParamKeyword {
            pub fn info(self) -> KeywordInfo {
                match self {
                    $( ParamKeyword::$pv => KeywordInfo {
                        name: $pn,
                        description: $pd,
                        category: KeywordCategory::Parameter,
                        access: AccessLevel::User,
                        needs_model: false,
                    }, )*
                }
            }

            pub fn all() -> &'static [ParamKeyword] {
                &[ $( ParamKeyword::$pv, )* ]
            }
        }

        impl CommandKeyword {
            pub fn info(self) -> KeywordInfo {
                match self {
                    $( CommandKeyword::$cv => KeywordInfo {
                        name: $cn,
                        description: $cd,
                        category: $cc,
                        access: $ca,
                        needs_model: define_keywords!(@has_flag model; $($cf)*),
                    }, )*
                }
            }

            pub fn all() -> &'static [CommandKeyword] {
                &[ $( CommandKeyword::$cv, )* ]
            }
        }

        // ── 3. dispatch() ──
        impl ParamKeyword {
            /// Parameters carry no access requirement; the setter validates
            /// the argument shape before staging anything.
            pub(crate) fn dispatch(
                self,
                session: &mut Session,
                args: &[String],
            ) -> Result<(), ScriptError> {
                match self {
                    $( ParamKeyword::$pv => $ph(session, $pn, args), )*
                }
            }
        }

        impl CommandKeyword {
            /// Checks access and the model requirement before the handler
            /// runs, so a refused command leaves the stage untouched.
            pub(crate) fn dispatch(self, session: &mut Session) -> Result<(), ScriptError> {
                let info = self.info();
                session.require(info.access)?;
                if info.needs_model && session.model().is_none() {
                    return Err(ScriptError::missing(format!(
                        "`{}` needs paper; create it with `new` first",
                        info.name
                    )));
                }
                match self {
                    $( CommandKeyword::$cv => $ch(session), )*
                }
            }
        }

        // ── 4. lookup() ──
        /// Resolve a script word. Parameter and command names are disjoint.
        pub fn lookup(word: &str) -> Option<Keyword> {
            match word {
                $( $pn => Some(Keyword::Param(ParamKeyword::$pv)), )*
                $( $cn => Some(Keyword::Command(CommandKeyword::$cv)), )*
                _ => None,
            }
        }
    };

    (@has_flag model; model $($rest:ident)*) => { true };
    (@has_flag model; $_other:ident $($rest:ident)*) => { define_keywords!(@has_flag model; $($rest)*) };
    (@has_flag model;) => { false };
}

// ── Keyword definitions ─────────────────────────────────────────

define_keywords! {
    params {
        Plane => stage::plane, "plane": "Stage a plane from a point (3 coords, or 2 paper coords) and a normal.";
        PlaneThrough => stage::plane_through, "planethrough": "Stage the plane through three points.";
        AngleBisector => stage::angle_bisector, "angle-bisector": "Stage the plane bisecting the angle p1-vertex-p3.";
        PlanePoint => stage::plane_point, "planepoint": "Stage only the plane point.";
        PlaneNormal => stage::plane_normal, "planenormal": "Stage only the plane normal.";
        Target => stage::target, "target": "Restrict the next fold or cut to the region containing this paper point.";
        Angle => stage::angle, "angle": "Stage the rotation angle in whole degrees.";
        Paper => stage::paper, "paper": "Stage a rectangle [x0 y0 x1 y1] or a preset: square, a4, hexagon, usd, huf.";
        Corner => stage::corner, "corner": "Append one corner [x y] to a custom paper outline.";
        Locale => stage::locale, "locale": "Set the presentation locale [language country].";
        Filename => stage::filename, "filename": "Set the file used by load, open, compile, textures and exports.";
        Title => stage::title, "title": "Stage the document title for export-autopdf.";
        Camera => stage::camera, "camera": "Set the camera direction, x axis and y axis.";
        Color => stage::color, "color": "Set the paper color as one packed value or three channels.";
        Uncolor => stage::uncolor, "uncolor": "Restore the default paper color.";
    }
    commands {
        // ── Fold ────────────────────────────────────────────────
        [KeywordCategory::Fold, AccessLevel::User]
        New => fold::new_paper, "new": "Create paper from the staged preset or corners. Clears the history.";

        [KeywordCategory::Fold, AccessLevel::User, model]
        Rotate => fold::rotate, "rotate": "Rotation fold along the staged plane by the staged angle.";

        [KeywordCategory::Fold, AccessLevel::User, model]
        Reflect => fold::reflect, "reflect": "Reflection fold along the staged plane.";

        [KeywordCategory::Fold, AccessLevel::User, model]
        Cut => fold::cut, "cut": "Cut the paper along the staged plane.";

        [KeywordCategory::Fold, AccessLevel::User, model]
        Undo => fold::undo, "undo": "Undo the last fold, replaying the history when the model cannot.";

        [KeywordCategory::Fold, AccessLevel::User, model]
        Redo => fold::redo, "redo": "Redo the last undone fold.";

        // ── File ────────────────────────────────────────────────
        [KeywordCategory::File, AccessLevel::Root]
        Compile => files::compile, "compile": "Run the script named by filename in a sandbox session.";

        [KeywordCategory::File, AccessLevel::Root]
        Load => files::load, "load": "Replace the paper by running the script named by filename.";

        [KeywordCategory::File, AccessLevel::Root]
        Open => files::open, "open": "Replace the paper from the native file named by filename.";

        [KeywordCategory::File, AccessLevel::User]
        LoadTexture => files::load_texture, "load-texture": "Use the opaque image named by filename as paper texture.";

        [KeywordCategory::File, AccessLevel::User]
        UnloadTexture => files::unload_texture, "unload-texture": "Drop the paper texture.";

        // ── Export ──────────────────────────────────────────────
        [KeywordCategory::Export, AccessLevel::User, model]
        ExportCtm => export::ctm, "export-ctm": "Export a textured mesh.";

        [KeywordCategory::Export, AccessLevel::User, model]
        ExportAutoPdf => export::auto_pdf, "export-autopdf": "Export a folding-instructions document. Needs a title.";

        [KeywordCategory::Export, AccessLevel::User, model]
        ExportGif => export::gif, "export-gif": "Export the folding sequence as a looping animation.";

        [KeywordCategory::Export, AccessLevel::User, model]
        ExportRevolvingGif => export::revolving_gif, "export-revolving-gif": "Export an animation revolving around the model.";

        [KeywordCategory::Export, AccessLevel::User, model]
        ExportJar => export::jar, "export-jar": "Export a portable viewer archive.";

        [KeywordCategory::Export, AccessLevel::User, model]
        ExportPng => export::png, "export-png": "Export a flat bitmap.";

        [KeywordCategory::Export, AccessLevel::User, model]
        ExportOri => export::ori, "export-ori": "Export the native replayable file.";

        // ── Terminal ────────────────────────────────────────────
        [KeywordCategory::Terminal, AccessLevel::Dev, model]
        Diagnostics => access::diagnostics, "diagnostics": "Dump vertices, polygons and corners to the transcript.";

        [KeywordCategory::Terminal, AccessLevel::User]
        Root => access::root, "root": "Ask the operator for ROOT access.";

        [KeywordCategory::Terminal, AccessLevel::User]
        Debug => access::debug, "debug": "Ask the operator for DEV access.";
    }
}

impl ParamKeyword {
    /// Parameters that set session appearance rather than staging a value.
    /// They are carried into a rebased history entry.
    pub fn is_appearance(self) -> bool {
        matches!(
            self,
            Self::Color | Self::Uncolor | Self::Locale | Self::Filename | Self::Camera
        )
    }
}

impl Keyword {
    pub fn info(self) -> KeywordInfo {
        match self {
            Keyword::Param(p) => p.info(),
            Keyword::Command(c) => c.info(),
        }
    }
}
