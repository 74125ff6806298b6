use super::parsing::{
    env_optional, env_or_default, parse_bool, parse_cors_origins, parse_environment, parse_u64,
};
use super::types::{
    ApiSettings, ConfigError, CorsSettings, CourseDataSettings, RatingsSettings, RuntimeSettings,
    ServerHost, ServerPort, ServerSettings, Settings, TelemetrySettings,
};

impl Settings {
    pub(crate) fn load() -> Result<Self, ConfigError> {
        let host = env_or_default("PROFMATCH_HOST", "0.0.0.0");
        let port = env_or_default("PROFMATCH_PORT", "8080");

        let environment = parse_environment(
            env_optional("PROFMATCH_ENV").or_else(|| env_optional("ENVIRONMENT")),
        );
        let strict_config = env_optional("PROFMATCH_STRICT_CONFIG")
            .map(|value| parse_bool(&value))
            .unwrap_or(false)
            || environment.is_production();

        let project_name = env_or_default("PROJECT_NAME", "ProfMatch API");
        let version = env_or_default("VERSION", env!("CARGO_PKG_VERSION"));
        let api_v1_str = env_or_default("API_V1_STR", "/api/v1");

        let cors_origins = parse_cors_origins(env_optional("BACKEND_CORS_ORIGINS"))?;

        let course_data_base_url =
            env_or_default("COURSE_DATA_BASE_URL", "https://anteaterapi.com/v2")
                .trim_end_matches('/')
                .to_string();
        let course_data_api_key = env_optional("COURSE_DATA_API_KEY");
        let course_data_timeout_seconds = parse_u64(
            "COURSE_DATA_TIMEOUT_SECONDS",
            env_or_default("COURSE_DATA_TIMEOUT_SECONDS", "30"),
        )?;
        let course_data_connect_timeout_seconds = parse_u64(
            "COURSE_DATA_CONNECT_TIMEOUT_SECONDS",
            env_or_default("COURSE_DATA_CONNECT_TIMEOUT_SECONDS", "10"),
        )?;

        let ratings_base_url =
            env_or_default("RATINGS_BASE_URL", "").trim_end_matches('/').to_string();
        let ratings_api_key = env_optional("RATINGS_API_KEY");
        let ratings_timeout_seconds = parse_u64(
            "RATINGS_TIMEOUT_SECONDS",
            env_or_default("RATINGS_TIMEOUT_SECONDS", "10"),
        )?;

        let log_level = env_or_default("PROFMATCH_LOG_LEVEL", "info");
        let json = env_optional("PROFMATCH_LOG_JSON").map(|value| parse_bool(&value)).unwrap_or(false);
        let prometheus_enabled =
            env_optional("PROMETHEUS_ENABLED").map(|value| parse_bool(&value)).unwrap_or(false);

        let settings = Self {
            server: ServerSettings {
                host: ServerHost::parse(host)?,
                port: ServerPort::parse(port)?,
            },
            runtime: RuntimeSettings { environment, strict_config },
            api: ApiSettings { project_name, version, api_v1_str },
            cors: CorsSettings { origins: cors_origins },
            course_data: CourseDataSettings {
                base_url: course_data_base_url,
                api_key: course_data_api_key,
                timeout_seconds: course_data_timeout_seconds,
                connect_timeout_seconds: course_data_connect_timeout_seconds,
            },
            ratings: RatingsSettings {
                base_url: ratings_base_url,
                api_key: ratings_api_key,
                timeout_seconds: ratings_timeout_seconds,
            },
            telemetry: TelemetrySettings { log_level, json, prometheus_enabled },
        };

        settings.validate()?;
        Ok(settings)
    }

    pub(crate) fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host.0, self.server.port.0)
    }

    pub(crate) fn server_host(&self) -> &str {
        &self.server.host.0
    }

    pub(crate) fn server_port(&self) -> u16 {
        self.server.port.0
    }

    pub(crate) fn api(&self) -> &ApiSettings {
        &self.api
    }

    pub(crate) fn cors(&self) -> &CorsSettings {
        &self.cors
    }

    pub(crate) fn course_data(&self) -> &CourseDataSettings {
        &self.course_data
    }

    pub(crate) fn ratings(&self) -> &RatingsSettings {
        &self.ratings
    }

    pub(crate) fn telemetry(&self) -> &TelemetrySettings {
        &self.telemetry
    }

    pub(crate) fn runtime(&self) -> &RuntimeSettings {
        &self.runtime
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.course_data.base_url.is_empty() {
            return Err(ConfigError::MissingValue("COURSE_DATA_BASE_URL"));
        }

        if self.course_data.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "COURSE_DATA_TIMEOUT_SECONDS",
                value: "0".to_string(),
            });
        }

        if self.course_data.connect_timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "COURSE_DATA_CONNECT_TIMEOUT_SECONDS",
                value: "0".to_string(),
            });
        }

        if self.ratings.is_enabled() && self.ratings.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "RATINGS_TIMEOUT_SECONDS",
                value: "0".to_string(),
            });
        }

        if !(self.runtime.strict_config || self.runtime.environment.is_production()) {
            return Ok(());
        }

        if self.ratings.is_enabled() && self.ratings.api_key.is_none() {
            return Err(ConfigError::MissingValue("RATINGS_API_KEY"));
        }

        Ok(())
    }
}
