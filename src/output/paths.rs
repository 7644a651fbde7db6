//! Path display helpers

use std::path::Path;

/// Render a path with the user's home directory shown as `~`
pub fn tildify(path: &Path) -> String {
    match dirs::home_dir() {
        Some(home) => tildify_with(path, &home),
        None => path.display().to_string(),
    }
}

fn tildify_with(path: &Path, home: &Path) -> String {
    if home.as_os_str().is_empty() {
        return path.display().to_string();
    }
    match path.strip_prefix(home) {
        Ok(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Ok(rest) => format!("~{}{}", std::path::MAIN_SEPARATOR, rest.display()),
        Err(_) => path.display().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_tildify_inside_home() {
        let home = PathBuf::from("/home/dev");
        let path = home.join("projects").join("api");
        assert_eq!(
            tildify_with(&path, &home),
            format!("~{0}projects{0}api", std::path::MAIN_SEPARATOR)
        );
    }

    #[test]
    fn test_tildify_home_itself() {
        let home = PathBuf::from("/home/dev");
        assert_eq!(tildify_with(&home, &home), "~");
    }

    #[test]
    fn test_tildify_outside_home() {
        let home = PathBuf::from("/home/dev");
        assert_eq!(tildify_with(Path::new("/srv/app"), &home), "/srv/app");
    }

    #[test]
    fn test_tildify_does_not_match_partial_component() {
        let home = PathBuf::from("/home/dev");
        assert_eq!(
            tildify_with(Path::new("/home/developer"), &home),
            "/home/developer"
        );
    }
}
