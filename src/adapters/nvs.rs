//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements [`SettingsPort`] and [`StoragePort`].  Settings are one
//! `postcard` blob under namespace `floortherm`, key `settings`, written
//! on every accepted change.  NVS commits are atomic, so a power cut
//! leaves either the old or the new blob.
//!
//! On host builds the backend is an in-memory map.

use log::{info, warn};

use crate::app::ports::{ConfigError, SettingsPort, StorageError, StoragePort};
use crate::config::SystemConfig;
use crate::settings::Settings;

#[cfg(not(target_os = "espidf"))]
use std::collections::HashMap;

#[cfg(target_os = "espidf")]
use esp_idf_svc::sys::*;

pub const SETTINGS_NAMESPACE: &str = "floortherm";
pub const SETTINGS_KEY: &str = "settings";

/// Largest blob read back.  Settings are a few dozen bytes.
const MAX_BLOB_SIZE: usize = 512;

/// NVS namespace and key names are at most 15 bytes.
#[cfg(target_os = "espidf")]
const NVS_NAME_MAX: usize = 15;

pub struct NvsAdapter {
    min_setpoint: i32,
    max_setpoint: i32,
    default_setpoint: i32,
    first_boot: Settings,
    #[cfg(not(target_os = "espidf"))]
    store: std::cell::RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsAdapter {
    /// Initialise NVS flash.  Setpoints outside the configured range are
    /// refused on save and reset to the default on load.
    ///
    /// A partition with no free pages or from a newer IDF version is
    /// erased and re-initialised.
    pub fn new(config: &SystemConfig) -> Result<Self, ConfigError> {
        #[cfg(target_os = "espidf")]
        {
            // SAFETY: called once from the main task before any other NVS use.
            let ret = unsafe { nvs_flash_init() };
            if ret == ESP_ERR_NVS_NO_FREE_PAGES as esp_err_t || ret == ESP_ERR_NVS_NEW_VERSION_FOUND as esp_err_t {
                warn!("NVS: erasing and re-initialising flash partition");
                if unsafe { nvs_flash_erase() } != ESP_OK as esp_err_t {
                    return Err(ConfigError::IoError);
                }
                if unsafe { nvs_flash_init() } != ESP_OK as esp_err_t {
                    return Err(ConfigError::IoError);
                }
            } else if ret != ESP_OK as esp_err_t {
                return Err(ConfigError::IoError);
            }
            info!("NvsAdapter: ESP-IDF NVS initialised");
        }

        #[cfg(not(target_os = "espidf"))]
        info!("NvsAdapter: simulation backend");

        Ok(Self {
            min_setpoint: config.min_setpoint_f,
            max_setpoint: config.max_setpoint_f,
            default_setpoint: config.default_setpoint_f,
            first_boot: Settings::defaults_for(config),
            #[cfg(not(target_os = "espidf"))]
            store: std::cell::RefCell::new(HashMap::new()),
        })
    }

    // ── Blob primitives (simulation) ──────────────────────────

    #[cfg(not(target_os = "espidf"))]
    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }

    #[cfg(not(target_os = "espidf"))]
    fn get_blob(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.store.borrow().get(&Self::composite_key(namespace, key)).cloned())
    }

    #[cfg(not(target_os = "espidf"))]
    fn put_blob(&self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        if data.len() > MAX_BLOB_SIZE {
            return Err(StorageError::Full);
        }
        self.store
            .borrow_mut()
            .insert(Self::composite_key(namespace, key), data.to_vec());
        Ok(())
    }

    #[cfg(not(target_os = "espidf"))]
    fn erase_blob(&self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.store.borrow_mut().remove(&Self::composite_key(namespace, key));
        Ok(())
    }

    // ── Blob primitives (ESP-IDF) ─────────────────────────────

    /// NUL-terminated copy of an NVS name, truncated to the NVS limit.
    #[cfg(target_os = "espidf")]
    fn c_name(name: &str) -> [u8; NVS_NAME_MAX + 1] {
        let mut buf = [0u8; NVS_NAME_MAX + 1];
        let len = name.len().min(NVS_NAME_MAX);
        buf[..len].copy_from_slice(&name.as_bytes()[..len]);
        buf
    }

    /// Open a namespace, run `f` with the handle, close it.
    #[cfg(target_os = "espidf")]
    fn with_handle<T>(
        namespace: &str,
        write: bool,
        f: impl FnOnce(nvs_handle_t) -> Result<T, esp_err_t>,
    ) -> Result<T, esp_err_t> {
        let ns = Self::c_name(namespace);
        let mode = if write {
            nvs_open_mode_t_NVS_READWRITE
        } else {
            nvs_open_mode_t_NVS_READONLY
        };
        let mut handle: nvs_handle_t = 0;
        let ret = unsafe { nvs_open(ns.as_ptr() as *const _, mode, &mut handle) };
        if ret != ESP_OK as esp_err_t {
            return Err(ret);
        }
        let result = f(handle);
        unsafe { nvs_close(handle) };
        result
    }

    #[cfg(target_os = "espidf")]
    fn map_err(ret: esp_err_t) -> StorageError {
        if ret == ESP_ERR_NVS_NOT_FOUND as esp_err_t {
            StorageError::NotFound
        } else if ret == ESP_ERR_NVS_NOT_ENOUGH_SPACE as esp_err_t {
            StorageError::Full
        } else {
            StorageError::IoError
        }
    }

    #[cfg(target_os = "espidf")]
    fn get_blob(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let k = Self::c_name(key);
        let result = Self::with_handle(namespace, false, |handle| {
            let mut size: usize = 0;
            let ret = unsafe { nvs_get_blob(handle, k.as_ptr() as *const _, core::ptr::null_mut(), &mut size) };
            if ret != ESP_OK as esp_err_t {
                return Err(ret);
            }
            if size > MAX_BLOB_SIZE {
                return Err(ESP_ERR_NVS_INVALID_LENGTH as esp_err_t);
            }
            let mut buf = vec![0u8; size];
            let ret = unsafe { nvs_get_blob(handle, k.as_ptr() as *const _, buf.as_mut_ptr() as *mut _, &mut size) };
            if ret != ESP_OK as esp_err_t {
                return Err(ret);
            }
            buf.truncate(size);
            Ok(buf)
        });
        match result {
            Ok(bytes) => Ok(Some(bytes)),
            Err(ret) if ret == ESP_ERR_NVS_NOT_FOUND as esp_err_t => Ok(None),
            Err(ret) => Err(Self::map_err(ret)),
        }
    }

    #[cfg(target_os = "espidf")]
    fn put_blob(&self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        let k = Self::c_name(key);
        Self::with_handle(namespace, true, |handle| {
            let ret = unsafe { nvs_set_blob(handle, k.as_ptr() as *const _, data.as_ptr() as *const _, data.len()) };
            if ret != ESP_OK as esp_err_t {
                return Err(ret);
            }
            let ret = unsafe { nvs_commit(handle) };
            if ret != ESP_OK as esp_err_t {
                return Err(ret);
            }
            Ok(())
        })
        .map_err(Self::map_err)
    }

    #[cfg(target_os = "espidf")]
    fn erase_blob(&self, namespace: &str, key: &str) -> Result<(), StorageError> {
        let k = Self::c_name(key);
        Self::with_handle(namespace, true, |handle| {
            let ret = unsafe { nvs_erase_key(handle, k.as_ptr() as *const _) };
            if ret != ESP_OK as esp_err_t && ret != ESP_ERR_NVS_NOT_FOUND as esp_err_t {
                return Err(ret);
            }
            let ret = unsafe { nvs_commit(handle) };
            if ret != ESP_OK as esp_err_t {
                return Err(ret);
            }
            Ok(())
        })
        .map_err(Self::map_err)
    }
}

impl SettingsPort for NvsAdapter {
    fn load(&self) -> Result<Settings, ConfigError> {
        match self.get_blob(SETTINGS_NAMESPACE, SETTINGS_KEY)? {
            Some(bytes) => {
                let mut settings: Settings =
                    postcard::from_bytes(&bytes).map_err(|_| ConfigError::Corrupted)?;
                // The accepted range can narrow across firmware versions.  Only
                // the offending setpoints fall back; the claimed index stays.
                let reset = settings.reset_out_of_range(
                    self.min_setpoint,
                    self.max_setpoint,
                    self.default_setpoint,
                );
                for zone in reset {
                    warn!(
                        "NvsAdapter: zone {} setpoint outside {}..={}, reset to {}",
                        zone, self.min_setpoint, self.max_setpoint, self.default_setpoint
                    );
                }
                info!("NvsAdapter: loaded settings ({} bytes)", bytes.len());
                Ok(settings)
            }
            None => {
                info!("NvsAdapter: no stored settings, using defaults");
                Ok(self.first_boot.clone())
            }
        }
    }

    fn save(&self, settings: &Settings) -> Result<(), ConfigError> {
        settings.validate(self.min_setpoint, self.max_setpoint)?;
        let bytes = postcard::to_allocvec(settings).map_err(|_| ConfigError::IoError)?;
        self.put_blob(SETTINGS_NAMESPACE, SETTINGS_KEY, &bytes).map_err(|e| {
            warn!("NvsAdapter: settings write failed: {}", e);
            ConfigError::from(e)
        })
    }
}

impl StoragePort for NvsAdapter {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        let data = self.get_blob(namespace, key)?.ok_or(StorageError::NotFound)?;
        let len = data.len().min(buf.len());
        buf[..len].copy_from_slice(&data[..len]);
        Ok(len)
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        self.put_blob(namespace, key, data)
    }

    fn delete(&mut self, namespace: &str, key: &str) -> Result<(), StorageError> {
        self.erase_blob(namespace, key)
    }

    fn exists(&self, namespace: &str, key: &str) -> bool {
        matches!(self.get_blob(namespace, key), Ok(Some(_)))
    }
}
