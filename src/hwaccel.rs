//! Hardware acceleration flag selection for the two FFmpeg passes.

use crate::error::{Result, TrimError};

const VAAPI_ARGS: [&str; 3] = ["-hwaccel", "vaapi", "-hwaccel_device"];

/// Hardware settings resolved from the command line.
#[derive(Debug, Default)]
pub struct HwAccel {
    vaapi: Option<String>,
    vaapi_decimate: Option<String>,
    videotoolbox: bool,
    videotoolbox_decimate: bool,
}

impl HwAccel {
    /// Resolve device selection. A bare `--vaapi-decimate`
    /// (`Some(None)`) reuses the `--vaapi` device and is an error
    /// when that is unset.
    pub fn resolve(
        vaapi: Option<&str>,
        vaapi_decimate: Option<Option<&str>>,
        videotoolbox: bool,
        videotoolbox_decimate: bool,
    ) -> Result<Self> {
        let vaapi_decimate = match vaapi_decimate {
            None => None,
            Some(Some(device)) => Some(device.to_string()),
            Some(None) => match vaapi {
                Some(device) => Some(device.to_string()),
                None => return Err(TrimError::MissingVaapiDevice),
            },
        };

        Ok(Self {
            vaapi: vaapi.map(str::to_string),
            vaapi_decimate,
            videotoolbox,
            videotoolbox_decimate,
        })
    }

    /// Hardware decode arguments for the decimate pass.
    /// VideoToolbox takes precedence over VA-API.
    pub fn decimate_args(&self) -> Vec<String> {
        if self.videotoolbox_decimate {
            return vec!["-hwaccel".to_string(), "videotoolbox".to_string()];
        }

        match &self.vaapi_decimate {
            Some(device) => VAAPI_ARGS
                .iter()
                .map(|arg| arg.to_string())
                .chain([device.clone()])
                .collect(),
            None => Vec::new(),
        }
    }

    /// Hardware decode and frame-upload arguments for the transcode
    /// pass. Only VA-API keeps decoded frames on the device.
    pub fn transcode_args(&self) -> Vec<String> {
        match &self.vaapi {
            Some(device) => VAAPI_ARGS
                .iter()
                .map(|arg| arg.to_string())
                .chain([
                    device.clone(),
                    "-hwaccel_output_format".to_string(),
                    "vaapi".to_string(),
                ])
                .collect(),
            None => Vec::new(),
        }
    }

    /// Encoder and quality arguments following `-c:v`.
    pub fn encoder_args(&self) -> Vec<String> {
        let args: &[&str] = if self.videotoolbox {
            &["hevc_videotoolbox", "-q:v", "65"]
        } else if self.vaapi.is_some() {
            &["hevc_vaapi", "-qp", "24"]
        } else {
            &["libx265", "-preset", "fast", "-crf", "30"]
        };
        args.iter().map(|arg| arg.to_string()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_bare_decimate_requires_vaapi() {
        let err = HwAccel::resolve(None, Some(None), false, false);
        assert!(matches!(err, Err(TrimError::MissingVaapiDevice)));
    }

    #[test]
    fn test_resolve_bare_decimate_inherits_vaapi_device() {
        let hw = HwAccel::resolve(Some("/dev/dri/renderD128"), Some(None), false, false).unwrap();
        assert_eq!(
            hw.decimate_args(),
            vec!["-hwaccel", "vaapi", "-hwaccel_device", "/dev/dri/renderD128"]
        );
    }

    #[test]
    fn test_resolve_explicit_decimate_device() {
        let hw = HwAccel::resolve(None, Some(Some("/dev/dri/renderD129")), false, false).unwrap();
        assert_eq!(
            hw.decimate_args(),
            vec!["-hwaccel", "vaapi", "-hwaccel_device", "/dev/dri/renderD129"]
        );
    }

    #[test]
    fn test_videotoolbox_decimate_takes_precedence() {
        let hw = HwAccel::resolve(Some("/dev/dri/renderD128"), Some(None), false, true).unwrap();
        assert_eq!(hw.decimate_args(), vec!["-hwaccel", "videotoolbox"]);
    }

    #[test]
    fn test_no_hwaccel_means_no_args() {
        let hw = HwAccel::resolve(None, None, false, false).unwrap();
        assert!(hw.decimate_args().is_empty());
        assert!(hw.transcode_args().is_empty());
    }

    #[test]
    fn test_transcode_args_upload_to_vaapi() {
        let hw = HwAccel::resolve(Some("/dev/dri/renderD128"), None, false, false).unwrap();
        assert_eq!(
            hw.transcode_args(),
            vec![
                "-hwaccel",
                "vaapi",
                "-hwaccel_device",
                "/dev/dri/renderD128",
                "-hwaccel_output_format",
                "vaapi"
            ]
        );
    }

    #[test]
    fn test_encoder_selection() {
        let software = HwAccel::resolve(None, None, false, false).unwrap();
        assert_eq!(
            software.encoder_args(),
            vec!["libx265", "-preset", "fast", "-crf", "30"]
        );

        let vaapi = HwAccel::resolve(Some("/dev/dri/renderD128"), None, false, false).unwrap();
        assert_eq!(vaapi.encoder_args(), vec!["hevc_vaapi", "-qp", "24"]);

        // VideoToolbox wins even when a VA-API device is configured.
        let vt = HwAccel::resolve(Some("/dev/dri/renderD128"), None, true, false).unwrap();
        assert_eq!(vt.encoder_args(), vec!["hevc_videotoolbox", "-q:v", "65"]);
    }
}
