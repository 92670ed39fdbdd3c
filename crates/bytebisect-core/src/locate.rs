//! 检测引擎可执行文件定位
use std::path::PathBuf;

use tracing::debug;

use crate::error::AnalyzeError;
use crate::options::EngineProfile;

/// 按优先级查找引擎：显式路径 → 已知安装目录 → PATH
pub fn locate_engine(profile: &EngineProfile) -> Result<PathBuf, AnalyzeError> {
    let path_var = std::env::var_os("PATH");
    let path_dirs: Vec<PathBuf> = path_var.as_deref().map(|p| std::env::split_paths(p).collect()).unwrap_or_default();
    locate_in(profile, &path_dirs)
}

fn locate_in(profile: &EngineProfile, path_dirs: &[PathBuf]) -> Result<PathBuf, AnalyzeError> {
    let mut searched = Vec::new();

    if let Some(explicit) = &profile.path {
        if explicit.is_file() {
            return Ok(explicit.clone());
        }
        searched.push(explicit.clone());
    }

    for dir in profile.search_dirs.iter().chain(path_dirs.iter()) {
        let candidate = dir.join(&profile.executable);
        debug!(?candidate, "probing for detection engine");
        if candidate.is_file() {
            return Ok(candidate);
        }
        searched.push(candidate);
    }

    Err(AnalyzeError::EngineNotFound { executable: profile.executable.clone(), searched })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;

    fn profile_in(dirs: Vec<PathBuf>) -> EngineProfile {
        EngineProfile { executable: "scanner".into(), search_dirs: dirs, ..Default::default() }
    }

    #[test]
    fn finds_engine_in_known_dir_before_path() {
        let known = tempfile::tempdir().unwrap();
        let on_path = tempfile::tempdir().unwrap();
        File::create(known.path().join("scanner")).unwrap();
        File::create(on_path.path().join("scanner")).unwrap();

        let found = locate_in(&profile_in(vec![known.path().to_path_buf()]), &[on_path.path().to_path_buf()]).unwrap();
        assert_eq!(found, known.path().join("scanner"));
    }

    #[test]
    fn falls_back_to_path_dirs() {
        let on_path = tempfile::tempdir().unwrap();
        File::create(on_path.path().join("scanner")).unwrap();
        let found = locate_in(&profile_in(vec![PathBuf::from("/definitely/missing")]), &[on_path.path().to_path_buf()]).unwrap();
        assert_eq!(found, on_path.path().join("scanner"));
    }

    #[test]
    fn explicit_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let exe = dir.path().join("custom-av");
        File::create(&exe).unwrap();
        let profile = EngineProfile { path: Some(exe.clone()), ..profile_in(Vec::new()) };
        assert_eq!(locate_in(&profile, &[]).unwrap(), exe);
    }

    #[test]
    fn directory_with_engine_name_is_not_an_engine() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("scanner")).unwrap();
        let err = locate_in(&profile_in(vec![dir.path().to_path_buf()]), &[]).unwrap_err();
        assert!(matches!(err, AnalyzeError::EngineNotFound { .. }));
    }

    #[test]
    fn not_found_lists_every_location_tried() {
        let profile = EngineProfile {
            path: Some(PathBuf::from("/nope/engine")),
            ..profile_in(vec![PathBuf::from("/a"), PathBuf::from("/b")])
        };
        match locate_in(&profile, &[PathBuf::from("/c")]).unwrap_err() {
            AnalyzeError::EngineNotFound { executable, searched } => {
                assert_eq!(executable, "scanner");
                assert_eq!(searched.len(), 4);
                assert_eq!(searched[0], PathBuf::from("/nope/engine"));
                assert_eq!(searched[3], PathBuf::from("/c").join("scanner"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
